//! Shared harness for the integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use marquee::{
    AppState, api_router,
    auth::TokenIssuer,
    catalog::Catalog,
    db,
    entities::{actor, director, episode, movie, movie_actor, season, tv_show, tv_show_actor},
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde_json::Value;
use tower::util::ServiceExt;

pub const ACCESS_SECRET: &str = "test-access-secret";
pub const REFRESH_SECRET: &str = "test-refresh-secret";
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "password";

pub struct TestApi {
    pub router: Router,
    pub db: DatabaseConnection,
    pub tokens: TokenIssuer,
}

impl TestApi {
    pub async fn new() -> Self {
        let db = db::connect_and_migrate("sqlite::memory:").await.unwrap();
        let tokens = TokenIssuer::new(ACCESS_SECRET, REFRESH_SECRET, ADMIN_USERNAME, ADMIN_PASSWORD);
        let state =
            Arc::new(AppState { catalog: Catalog::new(db.clone()), tokens: tokens.clone() });
        Self { router: api_router(state), db, tokens }
    }

    pub fn access_token(&self) -> String {
        self.tokens.login(ADMIN_USERNAME, ADMIN_PASSWORD).unwrap().token
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if body.is_empty() { Value::Null } else { serde_json::from_slice(&body).unwrap() };
        (status, json)
    }
}

pub fn get(uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: Value, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Ids of the rows inserted by [`seed_catalog`].
#[derive(Debug)]
pub struct Catalogue {
    pub nolan: i32,
    pub villeneuve: i32,
    pub gilligan: i32,
    pub dicaprio: i32,
    pub adams: i32,
    pub renner: i32,
    pub inception: i32,
    pub arrival: i32,
    pub dune: i32,
    pub breaking_bad: i32,
    pub better_call_saul: i32,
    pub bb_season_one: i32,
    pub pilot: i32,
    pub saul_pilot: i32,
}

pub async fn seed_catalog(db: &DatabaseConnection) -> Catalogue {
    let nolan = add_director(db, "Christopher Nolan").await;
    let villeneuve = add_director(db, "Denis Villeneuve").await;
    let gilligan = add_director(db, "Vince Gilligan").await;

    let dicaprio = add_actor(db, "Leonardo DiCaprio").await;
    let adams = add_actor(db, "Amy Adams").await;
    let renner = add_actor(db, "Jeremy Renner").await;

    let inception = add_movie(db, "Inception", "Sci-Fi", 2010, nolan, &[dicaprio]).await;
    let arrival = add_movie(db, "Arrival", "Sci-Fi", 2016, villeneuve, &[renner, adams]).await;
    let dune = add_movie(db, "Dune", "Adventure", 2021, villeneuve, &[]).await;

    let breaking_bad = add_show(db, "Breaking Bad", "Crime").await;
    let better_call_saul = add_show(db, "Better Call Saul", "Crime").await;
    tv_show_actor::Entity::insert(tv_show_actor::ActiveModel {
        tv_show_id: Set(breaking_bad),
        actor_id: Set(renner),
    })
    .exec_without_returning(db)
    .await
    .unwrap();

    let bb_season_one = add_season(db, breaking_bad, 1).await;
    let pilot = add_episode(db, bb_season_one, 1, "Pilot", gilligan).await;
    add_episode(db, bb_season_one, 2, "Cat's in the Bag...", gilligan).await;

    let saul_season_one = add_season(db, better_call_saul, 1).await;
    let saul_pilot = add_episode(db, saul_season_one, 1, "Uno", gilligan).await;

    Catalogue {
        nolan,
        villeneuve,
        gilligan,
        dicaprio,
        adams,
        renner,
        inception,
        arrival,
        dune,
        breaking_bad,
        better_call_saul,
        bb_season_one,
        pilot,
        saul_pilot,
    }
}

pub async fn add_director(db: &DatabaseConnection, name: &str) -> i32 {
    director::ActiveModel { name: Set(name.to_string()), ..Default::default() }
        .insert(db)
        .await
        .unwrap()
        .id
}

pub async fn add_actor(db: &DatabaseConnection, name: &str) -> i32 {
    actor::ActiveModel { name: Set(name.to_string()), ..Default::default() }
        .insert(db)
        .await
        .unwrap()
        .id
}

pub async fn add_movie(
    db: &DatabaseConnection,
    title: &str,
    genre: &str,
    year: i32,
    director_id: i32,
    actors: &[i32],
) -> i32 {
    let id = movie::ActiveModel {
        title: Set(title.to_string()),
        genre: Set(genre.to_string()),
        year: Set(year),
        director_id: Set(director_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id;

    for &actor_id in actors {
        movie_actor::Entity::insert(movie_actor::ActiveModel {
            movie_id: Set(id),
            actor_id: Set(actor_id),
        })
        .exec_without_returning(db)
        .await
        .unwrap();
    }
    id
}

pub async fn add_show(db: &DatabaseConnection, title: &str, genre: &str) -> i32 {
    tv_show::ActiveModel {
        title: Set(title.to_string()),
        genre: Set(genre.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

pub async fn add_season(db: &DatabaseConnection, show_id: i32, number: i32) -> i32 {
    season::ActiveModel {
        season_number: Set(number),
        tv_show_id: Set(show_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

pub async fn add_episode(
    db: &DatabaseConnection,
    season_id: i32,
    number: i32,
    title: &str,
    director_id: i32,
) -> i32 {
    episode::ActiveModel {
        title: Set(title.to_string()),
        episode_number: Set(number),
        season_id: Set(season_id),
        director_id: Set(director_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}
