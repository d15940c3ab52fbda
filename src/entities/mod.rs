pub mod actor;
pub mod director;
pub mod episode;
pub mod movie;
pub mod movie_actor;
pub mod season;
pub mod tv_show;
pub mod tv_show_actor;
