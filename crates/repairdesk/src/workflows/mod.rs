pub mod maintenance;
