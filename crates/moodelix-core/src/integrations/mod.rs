//! External services: the hosted Supabase backend and S3 URL signing.

pub mod presign_client;
pub mod s3;
pub mod supabase;

pub use presign_client::RemotePresigner;
pub use s3::S3Presigner;
pub use supabase::SupabaseStore;
