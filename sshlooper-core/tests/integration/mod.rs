mod dispatch_tests;
mod loader_tests;
