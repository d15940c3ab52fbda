use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tv_show_actor")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub tv_show_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub actor_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tv_show::Entity",
        from = "Column::TvShowId",
        to = "super::tv_show::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    TvShow,
    #[sea_orm(
        belongs_to = "super::actor::Entity",
        from = "Column::ActorId",
        to = "super::actor::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Actor,
}

impl Related<super::tv_show::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TvShow.def()
    }
}

impl Related<super::actor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Actor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
