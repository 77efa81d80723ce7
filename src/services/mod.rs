pub mod extract;
pub mod filmography;
pub mod genre_list;
pub mod movie_lookup;
pub mod providers;
pub mod recommend;
