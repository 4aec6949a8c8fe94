use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use crate::domain::festival::Festival;
use crate::domain::temple::{NewTemple, Temple, english_name_key};
use crate::domain::types::TempleId;
use crate::models::festival::Festival as DbFestival;
use crate::models::temple::{NewTemple as DbNewTemple, Temple as DbTemple};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    DieselRepository, TempleListQuery, TempleOrder, TempleReader, TempleWriter,
};

/// Converts rows into domain temples with their festivals in date order.
pub(super) fn load_with_festivals(
    conn: &mut SqliteConnection,
    rows: Vec<DbTemple>,
) -> RepositoryResult<Vec<Temple>> {
    use crate::schema::festivals;

    let festivals = DbFestival::belonging_to(&rows)
        .select(DbFestival::as_select())
        .order((festivals::date.asc(), festivals::id.asc()))
        .load::<DbFestival>(conn)?
        .grouped_by(&rows);

    rows.into_iter()
        .zip(festivals)
        .map(|(row, festivals)| -> RepositoryResult<Temple> {
            let mut temple = Temple::try_from(row)?;
            temple.festivals = festivals
                .into_iter()
                .map(TryInto::try_into)
                .collect::<Result<Vec<Festival>, _>>()?;
            Ok(temple)
        })
        .collect()
}

/// Finds a temple by [`english_name_key`]. SQLite's `lower()` folds ASCII
/// only, so the key is computed in Rust and stored alongside the name.
pub(super) fn find_by_english_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> RepositoryResult<Option<Temple>> {
    use crate::schema::temples;

    let row = temples::table
        .filter(temples::name_en_key.eq(english_name_key(name)))
        .select(DbTemple::as_select())
        .first(conn)
        .optional()?;

    match row {
        Some(row) => Ok(load_with_festivals(conn, vec![row])?.pop()),
        None => Ok(None),
    }
}

pub(super) fn insert_temple(
    conn: &mut SqliteConnection,
    temple: &NewTemple,
) -> RepositoryResult<Temple> {
    use crate::schema::temples;

    let db_temple = DbNewTemple::try_from(temple)?;
    let row = diesel::insert_into(temples::table)
        .values(&db_temple)
        .returning(DbTemple::as_returning())
        .get_result(conn)?;

    Ok(row.try_into()?)
}

impl TempleReader for DieselRepository {
    fn list_temples(&self, query: TempleListQuery) -> RepositoryResult<(usize, Vec<Temple>)> {
        use crate::schema::temples;

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = temples::table.into_boxed::<diesel::sqlite::Sqlite>();

            if let Some(search) = query.search.as_deref().map(str::trim)
                && !search.is_empty()
            {
                let pattern = format!("%{}%", english_name_key(search));
                items = items.filter(temples::name_en_key.like(pattern));
            }

            if let Some(temple_type) = query.temple_type {
                items = items.filter(temples::temple_type.eq(temple_type.as_str()));
            }

            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)?;
        let total = usize::try_from(total).unwrap_or_default();

        let mut items = query_builder();
        if let Some(pagination) = &query.pagination {
            items = items
                .offset(pagination.offset_i64())
                .limit(pagination.limit_i64());
        }

        items = match query.order {
            TempleOrder::Name => items.order((temples::name_en.asc(), temples::id.asc())),
            TempleOrder::NewestFirst => {
                items.order((temples::created_at.desc(), temples::id.desc()))
            }
            TempleOrder::OldestFirst => {
                items.order((temples::created_at.asc(), temples::id.asc()))
            }
        };

        let rows = items.load::<DbTemple>(&mut conn)?;
        let items = load_with_festivals(&mut conn, rows)?;

        Ok((total, items))
    }

    fn get_temple_by_id(&self, id: TempleId) -> RepositoryResult<Option<Temple>> {
        use crate::schema::temples;

        let mut conn = self.conn()?;

        let row = temples::table
            .filter(temples::id.eq(id.get()))
            .select(DbTemple::as_select())
            .first(&mut conn)
            .optional()?;

        match row {
            Some(row) => Ok(load_with_festivals(&mut conn, vec![row])?.pop()),
            None => Ok(None),
        }
    }

    fn find_temple_by_english_name(&self, name: &str) -> RepositoryResult<Option<Temple>> {
        let mut conn = self.conn()?;
        find_by_english_name(&mut conn, name)
    }
}

impl TempleWriter for DieselRepository {
    fn create_temple(&self, temple: &NewTemple) -> RepositoryResult<Temple> {
        let mut conn = self.conn()?;
        insert_temple(&mut conn, temple)
    }

    fn create_temples(&self, temples: &[NewTemple]) -> RepositoryResult<usize> {
        use crate::schema::temples as temples_table;

        let mut conn = self.conn()?;

        let rows = temples
            .iter()
            .map(DbNewTemple::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let affected = conn.transaction(|conn| {
            diesel::insert_into(temples_table::table)
                .values(&rows)
                .execute(conn)
        })?;

        Ok(affected)
    }

    fn update_temple(&self, id: TempleId, temple: &NewTemple) -> RepositoryResult<usize> {
        use crate::schema::temples;

        let mut conn = self.conn()?;
        let db_temple = DbNewTemple::try_from(temple)?;

        let affected = diesel::update(temples::table.filter(temples::id.eq(id.get())))
            .set((&db_temple, temples::updated_at.eq(diesel::dsl::now)))
            .execute(&mut conn)?;

        Ok(affected)
    }

    fn delete_temple(&self, id: TempleId) -> RepositoryResult<usize> {
        use crate::schema::{festivals, temples};

        let mut conn = self.conn()?;

        let affected = conn.transaction(|conn| {
            diesel::delete(festivals::table.filter(festivals::temple_id.eq(id.get())))
                .execute(conn)?;
            diesel::delete(temples::table.filter(temples::id.eq(id.get()))).execute(conn)
        })?;

        Ok(affected)
    }

    fn set_temples_open(&self, ids: &[TempleId], is_open: bool) -> RepositoryResult<usize> {
        use crate::schema::temples;

        if ids.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn()?;
        let ids = ids.iter().map(|id| id.get()).collect::<Vec<_>>();

        let affected = diesel::update(temples::table.filter(temples::id.eq_any(ids)))
            .set((
                temples::is_open.eq(is_open),
                temples::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)?;

        Ok(affected)
    }
}
