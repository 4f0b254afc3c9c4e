pub mod card;
pub mod deck;
pub mod scheme;
pub mod subject;
pub mod synthetic;
pub mod trial;
