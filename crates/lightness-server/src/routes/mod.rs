pub mod catalog;
pub mod events;
pub mod experiences;
pub mod playbook;
pub mod suggestions;
