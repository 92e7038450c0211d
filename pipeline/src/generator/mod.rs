pub mod photometry;
