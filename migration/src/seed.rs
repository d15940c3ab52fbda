//! CSV catalog seed.
//!
//! Reads the eight flat seed files and maps natural keys (names, titles,
//! season and episode numbers) onto generated ids. Rows that already exist
//! under the same natural key are reused, so loading the same directory twice
//! inserts nothing the second time.

use std::{collections::HashMap, path::Path};

use sea_orm_migration::sea_orm::{
    ConnectionTrait, DbErr,
    sea_query::{Alias, Expr, Query, SimpleExpr, Value},
};

type Row = HashMap<String, String>;

/// Number of rows inserted per table by one [`load_dir`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub directors: usize,
    pub actors: usize,
    pub movies: usize,
    pub movie_actors: usize,
    pub tv_shows: usize,
    pub seasons: usize,
    pub episodes: usize,
    pub tv_show_actors: usize,
}

pub async fn load_dir<C: ConnectionTrait>(db: &C, dir: &Path) -> Result<SeedReport, DbErr> {
    let directors_csv = read_csv(&dir.join("directors.csv"))?;
    let actors_csv = read_csv(&dir.join("actors.csv"))?;
    let movies_csv = read_csv(&dir.join("movies.csv"))?;
    let movie_actors_csv = read_csv(&dir.join("movie_actors.csv"))?;
    let tv_shows_csv = read_csv(&dir.join("tvshows.csv"))?;
    let seasons_csv = read_csv(&dir.join("seasons.csv"))?;
    let episodes_csv = read_csv(&dir.join("episodes.csv"))?;
    let tv_show_actors_csv = read_csv(&dir.join("tvshow_actors.csv"))?;

    let current_year = i32::from(jiff::Zoned::now().year());
    let mut report = SeedReport::default();

    let mut director_ids = HashMap::new();
    for row in &directors_csv {
        let Some(name) = field(row, "name") else { continue };
        let (id, inserted) = ensure(db, "director", &[("name", name.into())], &[]).await?;
        report.directors += usize::from(inserted);
        director_ids.insert(name.to_string(), id);
    }

    let mut actor_ids = HashMap::new();
    for row in &actors_csv {
        let Some(name) = field(row, "name") else { continue };
        let (id, inserted) = ensure(db, "actor", &[("name", name.into())], &[]).await?;
        report.actors += usize::from(inserted);
        actor_ids.insert(name.to_string(), id);
    }

    let mut movie_ids = HashMap::new();
    for row in &movies_csv {
        let (Some(title), Some(director)) = (field(row, "title"), field(row, "director_name"))
        else {
            continue;
        };
        let Some(&director_id) = director_ids.get(director) else { continue };
        let genre = field(row, "genre").unwrap_or("Unknown");
        let year = number(row, "year").unwrap_or(current_year);

        let (id, inserted) = ensure(
            db,
            "movie",
            &[("title", title.into())],
            &[("genre", genre.into()), ("year", year.into()), ("director_id", director_id.into())],
        )
        .await?;
        report.movies += usize::from(inserted);
        movie_ids.insert(title.to_string(), id);
    }

    for row in &movie_actors_csv {
        let (Some(movie), Some(actor)) = (field(row, "movie_title"), field(row, "actor_name"))
        else {
            continue;
        };
        let (Some(&movie_id), Some(&actor_id)) = (movie_ids.get(movie), actor_ids.get(actor))
        else {
            continue;
        };
        let inserted = link(
            db,
            "movie_actor",
            ("movie_id", movie_id),
            ("actor_id", actor_id),
        )
        .await?;
        report.movie_actors += usize::from(inserted);
    }

    let mut show_ids = HashMap::new();
    for row in &tv_shows_csv {
        let Some(title) = field(row, "title") else { continue };
        let genre = field(row, "genre").unwrap_or("Unknown");
        let (id, inserted) =
            ensure(db, "tv_show", &[("title", title.into())], &[("genre", genre.into())]).await?;
        report.tv_shows += usize::from(inserted);
        show_ids.insert(title.to_string(), id);
    }

    let mut season_ids = HashMap::new();
    for row in &seasons_csv {
        let (Some(show), Some(season_number)) =
            (field(row, "tvshow_title"), number(row, "season_number"))
        else {
            continue;
        };
        let Some(&show_id) = show_ids.get(show) else { continue };
        let (id, inserted) = ensure(
            db,
            "season",
            &[("tv_show_id", show_id.into()), ("season_number", season_number.into())],
            &[],
        )
        .await?;
        report.seasons += usize::from(inserted);
        season_ids.insert((show.to_string(), season_number), id);
    }

    for row in &episodes_csv {
        let (Some(show), Some(season_number), Some(episode_number), Some(title), Some(director)) = (
            field(row, "tvshow_title"),
            number(row, "season_number"),
            number(row, "episode_number"),
            field(row, "title"),
            field(row, "director_name"),
        ) else {
            continue;
        };
        let Some(&season_id) = season_ids.get(&(show.to_string(), season_number)) else {
            continue;
        };
        let Some(&director_id) = director_ids.get(director) else { continue };
        let (_, inserted) = ensure(
            db,
            "episode",
            &[("season_id", season_id.into()), ("episode_number", episode_number.into())],
            &[("title", title.into()), ("director_id", director_id.into())],
        )
        .await?;
        report.episodes += usize::from(inserted);
    }

    for row in &tv_show_actors_csv {
        let (Some(show), Some(actor)) = (field(row, "tvshow_title"), field(row, "actor_name"))
        else {
            continue;
        };
        let (Some(&show_id), Some(&actor_id)) = (show_ids.get(show), actor_ids.get(actor)) else {
            continue;
        };
        let inserted =
            link(db, "tv_show_actor", ("tv_show_id", show_id), ("actor_id", actor_id)).await?;
        report.tv_show_actors += usize::from(inserted);
    }

    Ok(report)
}

/// Removes the shows, movies, actors and directors named by the seed files.
/// Seasons, episodes and join rows go with them through cascading keys.
/// Actors and directors still referenced by rows added after seeding are kept.
pub async fn unload_dir<C: ConnectionTrait>(db: &C, dir: &Path) -> Result<(), DbErr> {
    let shows = column(&read_csv(&dir.join("tvshows.csv"))?, "title");
    let movies = column(&read_csv(&dir.join("movies.csv"))?, "title");
    let actors = column(&read_csv(&dir.join("actors.csv"))?, "name");
    let directors = column(&read_csv(&dir.join("directors.csv"))?, "name");

    delete_where_in(db, "tv_show", "title", shows, &[]).await?;
    delete_where_in(db, "movie", "title", movies, &[]).await?;
    delete_where_in(
        db,
        "actor",
        "name",
        actors,
        &[("movie_actor", "actor_id"), ("tv_show_actor", "actor_id")],
    )
    .await?;
    delete_where_in(
        db,
        "director",
        "name",
        directors,
        &[("movie", "director_id"), ("episode", "director_id")],
    )
    .await?;
    Ok(())
}

fn read_csv(path: &Path) -> Result<Vec<Row>, DbErr> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "seed file missing");
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let headers = reader.headers().map_err(|e| csv_error(path, e))?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, e))?;
        let row = headers
            .iter()
            .enumerate()
            .map(|(idx, h)| (h.to_string(), record.get(idx).unwrap_or_default().to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

fn csv_error(path: &Path, err: csv::Error) -> DbErr {
    DbErr::Custom(format!("{}: {err}", path.display()))
}

fn field<'a>(row: &'a Row, key: &str) -> Option<&'a str> {
    row.get(key).map(String::as_str).filter(|v| !v.is_empty())
}

fn number(row: &Row, key: &str) -> Option<i32> {
    field(row, key).and_then(|v| v.parse().ok()).filter(|n| *n != 0)
}

fn column(rows: &[Row], key: &str) -> Vec<String> {
    rows.iter().filter_map(|r| field(r, key)).map(str::to_string).collect()
}

/// Looks a row up by `keys`, inserting `keys` + `extra` when absent.
async fn ensure<C: ConnectionTrait>(
    db: &C,
    table: &str,
    keys: &[(&str, Value)],
    extra: &[(&str, Value)],
) -> Result<(i32, bool), DbErr> {
    let mut select = Query::select();
    select.column(Alias::new("id")).from(Alias::new(table));
    for (col, val) in keys {
        select.and_where(Expr::col(Alias::new(*col)).eq(val.clone()));
    }

    let backend = db.get_database_backend();
    if let Some(row) = db.query_one(backend.build(&select)).await? {
        return Ok((row.try_get::<i32>("", "id")?, false));
    }

    let mut insert = Query::insert();
    insert
        .into_table(Alias::new(table))
        .columns(keys.iter().chain(extra).map(|(col, _)| Alias::new(*col)))
        .values(keys.iter().chain(extra).map(|(_, val)| SimpleExpr::from(val.clone())))
        .map_err(|e| DbErr::Custom(e.to_string()))?;

    let res = db.execute(backend.build(&insert)).await?;
    Ok((res.last_insert_id() as i32, true))
}

async fn link<C: ConnectionTrait>(
    db: &C,
    table: &str,
    left: (&str, i32),
    right: (&str, i32),
) -> Result<bool, DbErr> {
    let backend = db.get_database_backend();

    let mut select = Query::select();
    select
        .expr(Expr::val(1))
        .from(Alias::new(table))
        .and_where(Expr::col(Alias::new(left.0)).eq(left.1))
        .and_where(Expr::col(Alias::new(right.0)).eq(right.1));
    if db.query_one(backend.build(&select)).await?.is_some() {
        return Ok(false);
    }

    let mut insert = Query::insert();
    insert
        .into_table(Alias::new(table))
        .columns([Alias::new(left.0), Alias::new(right.0)])
        .values([left.1.into(), right.1.into()])
        .map_err(|e| DbErr::Custom(e.to_string()))?;
    db.execute(backend.build(&insert)).await?;
    Ok(true)
}

async fn delete_where_in<C: ConnectionTrait>(
    db: &C,
    table: &str,
    col: &str,
    values: Vec<String>,
    referenced_by: &[(&str, &str)],
) -> Result<(), DbErr> {
    if values.is_empty() {
        return Ok(());
    }
    let mut delete = Query::delete();
    delete.from_table(Alias::new(table)).and_where(Expr::col(Alias::new(col)).is_in(values));
    for (other, fk) in referenced_by {
        let mut used = Query::select();
        used.column(Alias::new(*fk)).from(Alias::new(*other));
        delete.and_where(Expr::col(Alias::new("id")).not_in_subquery(used));
    }
    let result = db.execute(db.get_database_backend().build(&delete)).await?;
    tracing::debug!(table, deleted = result.rows_affected(), "unloaded seed rows");
    Ok(())
}
