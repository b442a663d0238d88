pub mod coinafrique;

pub use coinafrique::site_config;
