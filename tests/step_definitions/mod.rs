pub mod initialization_steps;
pub mod transition_steps;
