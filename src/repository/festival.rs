use chrono::NaiveDate;
use diesel::prelude::*;

use crate::domain::festival::{Festival, NewFestival};
use crate::domain::types::{FestivalId, TempleId};
use crate::models::festival::{Festival as DbFestival, NewFestival as DbNewFestival};
use crate::repository::errors::RepositoryResult;
use crate::repository::{DieselRepository, FestivalReader, FestivalWriter};

impl FestivalReader for DieselRepository {
    fn list_festivals(&self, temple_id: Option<TempleId>) -> RepositoryResult<Vec<Festival>> {
        use crate::schema::festivals;

        let mut conn = self.conn()?;

        let mut items = festivals::table.into_boxed::<diesel::sqlite::Sqlite>();
        if let Some(temple_id) = temple_id {
            items = items.filter(festivals::temple_id.eq(temple_id.get()));
        }

        let items = items
            .order((festivals::date.asc(), festivals::id.asc()))
            .load::<DbFestival>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Festival>, _>>()?;

        Ok(items)
    }

    fn get_festival_by_id(&self, id: FestivalId) -> RepositoryResult<Option<Festival>> {
        use crate::schema::festivals;

        let mut conn = self.conn()?;

        let festival = festivals::table
            .filter(festivals::id.eq(id.get()))
            .first::<DbFestival>(&mut conn)
            .optional()?;

        let festival = festival.map(TryInto::try_into).transpose()?;
        Ok(festival)
    }
}

impl FestivalWriter for DieselRepository {
    fn create_festival(&self, festival: &NewFestival) -> RepositoryResult<Festival> {
        use crate::schema::festivals;

        let mut conn = self.conn()?;
        let db_festival: DbNewFestival = festival.clone().into();

        let row = diesel::insert_into(festivals::table)
            .values(&db_festival)
            .returning(DbFestival::as_returning())
            .get_result(&mut conn)?;

        Ok(row.try_into()?)
    }

    fn update_festival(&self, id: FestivalId, festival: &NewFestival) -> RepositoryResult<usize> {
        use crate::schema::festivals;

        let mut conn = self.conn()?;
        let db_festival: DbNewFestival = festival.clone().into();

        let affected = diesel::update(festivals::table.filter(festivals::id.eq(id.get())))
            .set((&db_festival, festivals::updated_at.eq(diesel::dsl::now)))
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn delete_festival(&self, id: FestivalId) -> RepositoryResult<usize> {
        use crate::schema::festivals;

        let mut conn = self.conn()?;

        let affected =
            diesel::delete(festivals::table.filter(festivals::id.eq(id.get()))).execute(&mut conn)?;

        Ok(affected)
    }

    fn set_festival_active(&self, id: FestivalId, is_active: bool) -> RepositoryResult<usize> {
        use crate::schema::festivals;

        let mut conn = self.conn()?;

        let affected = diesel::update(festivals::table.filter(festivals::id.eq(id.get())))
            .set((
                festivals::is_active.eq(is_active),
                festivals::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn set_festival_date(&self, id: FestivalId, date: NaiveDate) -> RepositoryResult<usize> {
        use crate::schema::festivals;

        let mut conn = self.conn()?;

        let affected = diesel::update(festivals::table.filter(festivals::id.eq(id.get())))
            .set((
                festivals::date.eq(date),
                festivals::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)?;

        Ok(affected)
    }
}
