//! Integration tests driving the SlideHub facade end to end with the
//! scripted fake automation host.

mod helpers;

mod assembly_test;
mod conversion_test;
mod keyword_test;
mod project_test;
mod search_test;
mod undo_test;
