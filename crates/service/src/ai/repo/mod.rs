pub mod seaorm;

pub use seaorm::{SeaOrmActionStore, SeaOrmActionTarget};
