use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Director::Table)
                    .if_not_exists()
                    .col(pk_auto(Director::Id))
                    .col(string(Director::Name))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Actor::Table)
                    .if_not_exists()
                    .col(pk_auto(Actor::Id))
                    .col(string(Actor::Name))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Movie::Table)
                    .if_not_exists()
                    .col(pk_auto(Movie::Id))
                    .col(string(Movie::Title))
                    .col(string(Movie::Genre))
                    .col(integer(Movie::Year))
                    .col(integer(Movie::DirectorId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_director")
                            .from(Movie::Table, Movie::DirectorId)
                            .to(Director::Table, Director::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TvShow::Table)
                    .if_not_exists()
                    .col(pk_auto(TvShow::Id))
                    .col(string(TvShow::Title))
                    .col(string(TvShow::Genre))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Season::Table)
                    .if_not_exists()
                    .col(pk_auto(Season::Id))
                    .col(integer(Season::SeasonNumber))
                    .col(integer(Season::TvShowId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_season_tv_show")
                            .from(Season::Table, Season::TvShowId)
                            .to(TvShow::Table, TvShow::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Episode::Table)
                    .if_not_exists()
                    .col(pk_auto(Episode::Id))
                    .col(string(Episode::Title))
                    .col(integer(Episode::EpisodeNumber))
                    .col(integer(Episode::SeasonId))
                    .col(integer(Episode::DirectorId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_episode_season")
                            .from(Episode::Table, Episode::SeasonId)
                            .to(Season::Table, Season::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_episode_director")
                            .from(Episode::Table, Episode::DirectorId)
                            .to(Director::Table, Director::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieActor::Table)
                    .if_not_exists()
                    .col(integer(MovieActor::MovieId))
                    .col(integer(MovieActor::ActorId))
                    .primary_key(Index::create().col(MovieActor::MovieId).col(MovieActor::ActorId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_actor_movie")
                            .from(MovieActor::Table, MovieActor::MovieId)
                            .to(Movie::Table, Movie::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_actor_actor")
                            .from(MovieActor::Table, MovieActor::ActorId)
                            .to(Actor::Table, Actor::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_actor_movie_id")
                    .table(MovieActor::Table)
                    .col(MovieActor::MovieId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_actor_actor_id")
                    .table(MovieActor::Table)
                    .col(MovieActor::ActorId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TvShowActor::Table)
                    .if_not_exists()
                    .col(integer(TvShowActor::TvShowId))
                    .col(integer(TvShowActor::ActorId))
                    .primary_key(
                        Index::create().col(TvShowActor::TvShowId).col(TvShowActor::ActorId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tv_show_actor_tv_show")
                            .from(TvShowActor::Table, TvShowActor::TvShowId)
                            .to(TvShow::Table, TvShow::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tv_show_actor_actor")
                            .from(TvShowActor::Table, TvShowActor::ActorId)
                            .to(Actor::Table, Actor::Id)
                            .on_delete(ForeignKeyAction::NoAction)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tv_show_actor_tv_show_id")
                    .table(TvShowActor::Table)
                    .col(TvShowActor::TvShowId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tv_show_actor_actor_id")
                    .table(TvShowActor::Table)
                    .col(TvShowActor::ActorId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(TvShowActor::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(MovieActor::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Episode::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Season::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(TvShow::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Movie::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Actor::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Director::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Director {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Actor {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Movie {
    Table,
    Id,
    Title,
    Genre,
    Year,
    DirectorId,
}

#[derive(DeriveIden)]
enum TvShow {
    Table,
    Id,
    Title,
    Genre,
}

#[derive(DeriveIden)]
enum Season {
    Table,
    Id,
    SeasonNumber,
    TvShowId,
}

#[derive(DeriveIden)]
enum Episode {
    Table,
    Id,
    Title,
    EpisodeNumber,
    SeasonId,
    DirectorId,
}

#[derive(DeriveIden)]
enum MovieActor {
    Table,
    MovieId,
    ActorId,
}

#[derive(DeriveIden)]
enum TvShowActor {
    Table,
    TvShowId,
    ActorId,
}
