mod common;

mod store_tests;
