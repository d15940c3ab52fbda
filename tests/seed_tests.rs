use std::{fs, path::Path};

use marquee::{
    db,
    entities::{actor, director, episode, movie, movie_actor, season, tv_show, tv_show_actor},
};
use migration::seed::{SeedReport, load_dir, unload_dir};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set,
};
use tempfile::TempDir;

async fn counts(db: &DatabaseConnection) -> [u64; 8] {
    [
        director::Entity::find().count(db).await.unwrap(),
        actor::Entity::find().count(db).await.unwrap(),
        movie::Entity::find().count(db).await.unwrap(),
        movie_actor::Entity::find().count(db).await.unwrap(),
        tv_show::Entity::find().count(db).await.unwrap(),
        season::Entity::find().count(db).await.unwrap(),
        episode::Entity::find().count(db).await.unwrap(),
        tv_show_actor::Entity::find().count(db).await.unwrap(),
    ]
}

fn write(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}

fn small_seed() -> TempDir {
    let dir = TempDir::new().unwrap();
    let p = dir.path();
    write(p, "directors.csv", "name\nGreta Gerwig\n Noah Baumbach \n\n");
    write(p, "actors.csv", "name\nSaoirse Ronan\nAdam Driver\n");
    write(
        p,
        "movies.csv",
        "title,genre,year,director_name\n\
         Lady Bird,Drama,2017,Greta Gerwig\n\
         Marriage Story,,0,Noah Baumbach\n\
         Orphan,Drama,2000,Nobody Known\n",
    );
    write(
        p,
        "movie_actors.csv",
        "movie_title,actor_name\nLady Bird,Saoirse Ronan\nMarriage Story,Adam Driver\nLady Bird,Nobody\n",
    );
    write(p, "tvshows.csv", "title,genre\nGirls,Comedy\n");
    write(p, "seasons.csv", "tvshow_title,season_number\nGirls,1\nGirls,x\n");
    write(
        p,
        "episodes.csv",
        "tvshow_title,season_number,episode_number,title,director_name\n\
         Girls,1,1,Pilot,Greta Gerwig\n\
         Girls,2,1,Nowhere,Greta Gerwig\n",
    );
    write(p, "tvshow_actors.csv", "tvshow_title,actor_name\nGirls,Adam Driver\n");
    dir
}

#[tokio::test]
async fn loading_twice_inserts_nothing_new() {
    let db = db::connect_and_migrate("sqlite::memory:").await.unwrap();
    let dir = small_seed();

    let first = load_dir(&db, dir.path()).await.unwrap();
    assert_eq!(
        first,
        SeedReport {
            directors: 2,
            actors: 2,
            movies: 2,
            movie_actors: 2,
            tv_shows: 1,
            seasons: 1,
            episodes: 1,
            tv_show_actors: 1,
        }
    );
    let after_first = counts(&db).await;

    let second = load_dir(&db, dir.path()).await.unwrap();
    assert_eq!(second, SeedReport::default());
    assert_eq!(counts(&db).await, after_first);
}

#[tokio::test]
async fn missing_values_fall_back_to_defaults() {
    let db = db::connect_and_migrate("sqlite::memory:").await.unwrap();
    let dir = small_seed();
    load_dir(&db, dir.path()).await.unwrap();

    let movies = movie::Entity::find().all(&db).await.unwrap();
    let story = movies.iter().find(|m| m.title == "Marriage Story").unwrap();
    assert_eq!(story.genre, "Unknown");
    assert_eq!(story.year, i32::from(jiff::Zoned::now().year()));

    let baumbach = director::Entity::find_by_id(story.director_id).one(&db).await.unwrap().unwrap();
    assert_eq!(baumbach.name, "Noah Baumbach");
}

#[tokio::test]
async fn unloading_removes_seeded_rows() {
    let db = db::connect_and_migrate("sqlite::memory:").await.unwrap();
    let dir = small_seed();
    load_dir(&db, dir.path()).await.unwrap();

    unload_dir(&db, dir.path()).await.unwrap();
    assert_eq!(counts(&db).await, [0; 8]);
}

#[tokio::test]
async fn unloading_keeps_people_still_in_use() {
    let db = db::connect_and_migrate("sqlite::memory:").await.unwrap();
    let dir = small_seed();
    load_dir(&db, dir.path()).await.unwrap();

    let gerwig = director::Entity::find()
        .filter(director::Column::Name.eq("Greta Gerwig"))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    movie::ActiveModel {
        title: Set("Little Women".to_string()),
        genre: Set("Drama".to_string()),
        year: Set(2019),
        director_id: Set(gerwig.id),
        ..Default::default()
    }
    .insert(&db)
    .await
    .unwrap();

    unload_dir(&db, dir.path()).await.unwrap();

    let directors = director::Entity::find().all(&db).await.unwrap();
    assert_eq!(directors.len(), 1);
    assert_eq!(directors[0].name, "Greta Gerwig");
    assert_eq!(movie::Entity::find().count(&db).await.unwrap(), 1);
    assert_eq!(actor::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn missing_files_are_skipped() {
    let db = db::connect_and_migrate("sqlite::memory:").await.unwrap();
    let dir = TempDir::new().unwrap();
    write(dir.path(), "directors.csv", "name\nAgnès Varda\n");

    let report = load_dir(&db, dir.path()).await.unwrap();
    assert_eq!(report.directors, 1);
    assert_eq!(report.movies, 0);
}

#[tokio::test]
async fn bundled_seed_loads() {
    let db = db::connect_and_migrate("sqlite::memory:").await.unwrap();
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("seed");

    let report = load_dir(&db, &dir).await.unwrap();
    assert_eq!(report.movies, 5);
    assert_eq!(report.episodes, 3);
    assert_eq!(counts(&db).await[3], 7);
}
