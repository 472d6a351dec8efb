pub mod dates;
pub mod multipart;
