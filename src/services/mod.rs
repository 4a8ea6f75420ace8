pub mod paced;
pub mod playlist_builder;
pub mod sign_in;
pub mod youtube;
