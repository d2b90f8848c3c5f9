mod mock_fs;

mod parsing_tests;
mod version_tests;
