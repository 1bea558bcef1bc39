// Adapters layer: concrete implementations of the domain ports for external systems.

pub mod mediawiki;

pub use mediawiki::MediaWikiClient;
