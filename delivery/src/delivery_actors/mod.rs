pub mod dispatcher;
pub mod tracker;
