pub mod festivals;
pub mod import_export;
pub mod submissions;
pub mod temples;
