use std::collections::{BTreeSet, HashMap};

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::{
    entities::{actor, director, episode, movie, movie_actor, season, tv_show},
    error::{AppError, AppResult},
    models::{Actor, EpisodeDetail, Movie, MovieQuery, MovieSort, NewMovie, SeasonSummary, Show},
};

/// Read/write access to the movie and TV catalog.
#[derive(Clone)]
pub struct Catalog {
    db: DatabaseConnection,
}

impl Catalog {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn list_movies(&self, query: &MovieQuery) -> AppResult<Vec<Movie>> {
        let mut select = movie::Entity::find().find_also_related(director::Entity);

        if let Some(genre) = query.genre.as_deref().filter(|g| !g.is_empty()) {
            select = select.filter(movie::Column::Genre.eq(genre));
        }

        select = match query.sort.as_deref().and_then(MovieSort::parse) {
            Some(MovieSort::Title) => select.order_by_asc(movie::Column::Title),
            Some(MovieSort::Year) => select.order_by_asc(movie::Column::Year),
            None => select.order_by_asc(movie::Column::Id),
        };

        let rows = select.all(&self.db).await?;
        let ids: Vec<i32> = rows.iter().map(|(m, _)| m.id).collect();
        let mut cast = self.actors_by_movie(&ids).await?;

        let mut movies = Vec::with_capacity(rows.len());
        for (m, director) in rows {
            let director = director.ok_or_else(|| {
                anyhow::anyhow!("movie {} references missing director {}", m.id, m.director_id)
            })?;
            let actors = cast.remove(&m.id).unwrap_or_default();
            movies.push(Movie::assemble(m, director.into(), actors));
        }
        Ok(movies)
    }

    pub async fn create_movie(&self, new: NewMovie) -> AppResult<Movie> {
        let title = new.title.filter(|t| !t.trim().is_empty());
        let genre = new.genre.filter(|g| !g.trim().is_empty());
        let director_id = new.director_id.filter(|id| *id != 0);
        let (Some(title), Some(genre), Some(director_id)) = (title, genre, director_id) else {
            return Err(AppError::Validation(
                "Title, genre, and directorId are required".to_string(),
            ));
        };

        let director = director::Entity::find_by_id(director_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Director not found".to_string()))?;

        let actors = match new.actor_ids.filter(|ids| !ids.is_empty()) {
            Some(ids) => self.resolve_actors(&ids).await?,
            None => Vec::new(),
        };

        let year = match new.year.filter(|y| *y != 0) {
            Some(year) => year,
            None => i32::from(jiff::Zoned::now().year()),
        };

        let txn = self.db.begin().await?;

        let model = movie::ActiveModel {
            id: Default::default(),
            title: Set(title),
            genre: Set(genre),
            year: Set(year),
            director_id: Set(director.id),
        };
        let created = movie::Entity::insert(model).exec_with_returning(&txn).await?;

        if !actors.is_empty() {
            let links = actors.iter().map(|a| movie_actor::ActiveModel {
                movie_id: Set(created.id),
                actor_id: Set(a.id),
            });
            movie_actor::Entity::insert_many(links).exec_without_returning(&txn).await?;
        }

        txn.commit().await?;

        tracing::debug!(movie_id = created.id, actors = actors.len(), "created movie");
        Ok(Movie::assemble(created, director.into(), actors))
    }

    pub async fn get_episode(&self, show_id: i32, episode_id: i32) -> AppResult<EpisodeDetail> {
        let not_found = || AppError::NotFound("Episode not found for this TV show".to_string());

        let (episode, season) = episode::Entity::find_by_id(episode_id)
            .find_also_related(season::Entity)
            .one(&self.db)
            .await?
            .ok_or_else(not_found)?;
        let season = season.ok_or_else(not_found)?;
        if season.tv_show_id != show_id {
            return Err(not_found());
        }

        let show = tv_show::Entity::find_by_id(season.tv_show_id)
            .one(&self.db)
            .await?
            .ok_or_else(not_found)?;
        let director = director::Entity::find_by_id(episode.director_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "episode {} references missing director {}",
                    episode.id,
                    episode.director_id
                )
            })?;

        Ok(EpisodeDetail::assemble(
            episode,
            SeasonSummary::assemble(season, Show::from(show)),
            director.into(),
        ))
    }

    /// Resolves every id or fails naming the ones that do not exist, in the
    /// order they were requested. Duplicates collapse to one actor.
    async fn resolve_actors(&self, ids: &[i32]) -> AppResult<Vec<Actor>> {
        let unique: BTreeSet<i32> = ids.iter().copied().collect();
        let found: HashMap<i32, actor::Model> = actor::Entity::find()
            .filter(actor::Column::Id.is_in(unique.iter().copied()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        let mut reported = BTreeSet::new();
        let missing: Vec<i32> = ids
            .iter()
            .copied()
            .filter(|id| !found.contains_key(id) && reported.insert(*id))
            .collect();
        if !missing.is_empty() {
            let names: Vec<String> = missing.iter().map(i32::to_string).collect();
            return Err(AppError::NotFound(format!("Actors not found: {}", names.join(", "))));
        }

        let mut seen = BTreeSet::new();
        Ok(ids
            .iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| found.get(id).cloned())
            .map(Actor::from)
            .collect())
    }

    async fn actors_by_movie(&self, movie_ids: &[i32]) -> AppResult<HashMap<i32, Vec<Actor>>> {
        if movie_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let links = movie_actor::Entity::find()
            .filter(movie_actor::Column::MovieId.is_in(movie_ids.iter().copied()))
            .all(&self.db)
            .await?;

        let actor_ids: BTreeSet<i32> = links.iter().map(|l| l.actor_id).collect();
        let actors: HashMap<i32, actor::Model> = actor::Entity::find()
            .filter(actor::Column::Id.is_in(actor_ids))
            .order_by_asc(actor::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|a| (a.id, a))
            .collect();

        let mut out: HashMap<i32, Vec<Actor>> = HashMap::new();
        for link in links {
            if let Some(a) = actors.get(&link.actor_id) {
                out.entry(link.movie_id).or_default().push(a.clone().into());
            }
        }
        for cast in out.values_mut() {
            cast.sort_by_key(|a| a.id);
        }
        Ok(out)
    }
}
