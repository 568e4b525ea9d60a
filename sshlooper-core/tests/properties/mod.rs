mod export_tests;
mod extract_tests;
mod safety_tests;
