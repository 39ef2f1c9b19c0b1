#[macro_export]
macro_rules! debug_log {
	($($arg:tt)*) => {{
		#[cfg(debug_assertions)]
		{
			eprintln!($($arg)*);
		}
	}};
}

pub mod language;
pub mod tree;
pub mod query;
pub mod comment;
pub mod shapes;
pub mod skeleton;
pub mod md_lexer;
pub mod markdown;
pub mod parser;
pub mod batch;
pub mod config;
pub mod scanner;
