//! HTML rendering and extraction: browser pool, page helpers, JSON-LD
//! structured data, portal selector scrapers, and the routing registry.

pub mod browser;
pub mod jsonld;
pub mod parse;
pub mod portal;
pub mod registry;
pub mod session;
pub mod url;
