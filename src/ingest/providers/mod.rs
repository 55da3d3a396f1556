pub mod google_news;
pub mod newsapi;
