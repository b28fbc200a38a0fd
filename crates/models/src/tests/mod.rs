
/// CRUD operations tests for the ticketing entities
pub mod crud_tests;
