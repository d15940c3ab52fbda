use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "season")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub season_number: i32,
    pub tv_show_id: i32,
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
    #[sea_orm(has_many = "super::episode::Entity")]
    Episode,
}

impl Related<super::tv_show::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TvShow.def()
    }
}

impl Related<super::episode::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Episode.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
