pub mod lock;
pub mod pacparse;
pub mod pkginfo;
