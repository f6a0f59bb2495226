pub mod ast;
pub mod ast_printer;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod scanner;
pub mod session;
pub mod token;
pub mod value;

pub use error::{LucaError, Result};
pub use interpreter::Interpreter;
pub use parser::parse;
pub use resolver::{resolve, Distances};
pub use scanner::scan;
pub use session::{RunOutcome, Session};
