pub mod concourse;
