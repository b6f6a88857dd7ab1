/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::exchanges;

/// A trading venue row; seeded at startup, never deleted by the engine.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Serialize, Deserialize)]
#[diesel(table_name = exchanges)]
pub struct Exchange {
  pub id: Uuid,
  pub code: String,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = exchanges)]
pub struct NewExchange {
  pub id: Uuid,
  pub code: String,
}

impl Exchange {
  pub async fn find_by_code(
    conn: &mut diesel_async::AsyncPgConnection,
    code_param: &str,
  ) -> Result<Option<Exchange>, diesel::result::Error> {
    exchanges::table
      .filter(exchanges::code.eq(code_param))
      .first::<Exchange>(conn)
      .await
      .optional()
  }

  pub async fn list_all(
    conn: &mut diesel_async::AsyncPgConnection,
  ) -> Result<Vec<Exchange>, diesel::result::Error> {
    exchanges::table.order(exchanges::code.asc()).load::<Exchange>(conn).await
  }
}

impl NewExchange {
  /// Insert the venue row if its code is not present yet (seeding).
  pub async fn insert_if_missing(
    &self,
    conn: &mut diesel_async::AsyncPgConnection,
  ) -> Result<usize, diesel::result::Error> {
    diesel::insert_into(exchanges::table)
      .values(self)
      .on_conflict(exchanges::code)
      .do_nothing()
      .execute(conn)
      .await
  }
}
