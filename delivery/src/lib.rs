pub mod api;
pub mod console;
pub mod delivery_actors;
pub mod messages;

#[cfg(test)]
mod testing;
