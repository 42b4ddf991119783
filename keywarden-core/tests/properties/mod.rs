mod database_tests;
mod vault_tests;
