pub mod ids;
pub mod job;
pub mod reservation;
pub mod resources;
