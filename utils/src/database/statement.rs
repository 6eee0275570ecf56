use deadpool_postgres::{Pool, PoolError};
use postgres_from_row::FromRow;
use postgres_types::ToSql;

/// SQL text plus the values bound to its `$n` placeholders.
#[derive(Default)]
pub struct Statement {
	sql: String,
	params: Vec<Box<dyn ToSql + Send + Sync>>,
}

impl Statement {
	pub fn new(sql: impl Into<String>) -> Self {
		Self {
			sql: sql.into(),
			params: Vec::new(),
		}
	}

	/// Binds the next parameter to a placeholder already written in the text.
	pub fn bind(mut self, param: impl ToSql + Send + Sync + 'static) -> Self {
		self.params.push(Box::new(param));
		self
	}

	pub fn push(&mut self, sql: &str) -> &mut Self {
		self.sql.push_str(sql);
		self
	}

	/// Binds a parameter and writes its placeholder at the end of the text.
	pub fn push_bind(&mut self, param: impl ToSql + Send + Sync + 'static) -> &mut Self {
		self.params.push(Box::new(param));
		let placeholder = format!("${}", self.params.len());
		self.sql.push_str(&placeholder);
		self
	}

	/// Starts a comma separated `column = value` list, as in `UPDATE .. SET`.
	pub fn assignments(&mut self) -> Assignments<'_> {
		Assignments {
			statement: self,
			empty: true,
		}
	}

	pub fn sql(&self) -> &str {
		&self.sql
	}

	pub fn param_count(&self) -> usize {
		self.params.len()
	}

	fn params(&self) -> Vec<&(dyn ToSql + Sync)> {
		self.params.iter().map(|param| param.as_ref() as &(dyn ToSql + Sync)).collect()
	}

	/// Number of affected rows.
	pub async fn execute(&self, pool: &Pool) -> Result<u64, PoolError> {
		let client = pool.get().await?;
		Ok(client.execute(self.sql.as_str(), &self.params()).await?)
	}

	pub async fn fetch_all<T: FromRow>(&self, pool: &Pool) -> Result<Vec<T>, PoolError> {
		let client = pool.get().await?;
		let rows = client.query(self.sql.as_str(), &self.params()).await?;

		let mut records = Vec::with_capacity(rows.len());
		for row in &rows {
			records.push(T::try_from_row(row)?);
		}

		Ok(records)
	}

	/// Fails unless exactly one row comes back.
	pub async fn fetch_one<T: FromRow>(&self, pool: &Pool) -> Result<T, PoolError> {
		let client = pool.get().await?;
		let row = client.query_one(self.sql.as_str(), &self.params()).await?;

		Ok(T::try_from_row(&row)?)
	}

	pub async fn fetch_optional<T: FromRow>(&self, pool: &Pool) -> Result<Option<T>, PoolError> {
		let client = pool.get().await?;
		match client.query_opt(self.sql.as_str(), &self.params()).await? {
			Some(row) => Ok(Some(T::try_from_row(&row)?)),
			None => Ok(None),
		}
	}
}

pub struct Assignments<'a> {
	statement: &'a mut Statement,
	empty: bool,
}

impl Assignments<'_> {
	pub fn set(&mut self, column: &str, value: impl ToSql + Send + Sync + 'static) -> &mut Self {
		self.separate();
		self.statement.push(column).push(" = ").push_bind(value);
		self
	}

	/// An assignment with no bound value, such as `updated_at = NOW()`.
	pub fn set_raw(&mut self, assignment: &str) -> &mut Self {
		self.separate();
		self.statement.push(assignment);
		self
	}

	fn separate(&mut self) {
		if !self.empty {
			self.statement.push(", ");
		}
		self.empty = false;
	}
}
