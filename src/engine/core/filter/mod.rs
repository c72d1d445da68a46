pub mod any_case_phrase_filter;
pub mod column_matchers;
pub mod filter;
pub mod phrase_filter;
pub mod prefix_filter;
pub mod stream_filter;
pub mod token_filter;

#[cfg(test)]
mod any_case_phrase_filter_test;
#[cfg(test)]
mod filter_test;
#[cfg(test)]
mod phrase_filter_test;
