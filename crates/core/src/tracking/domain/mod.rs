pub mod presence_tracker;
