//! Sorted, offset-paged selects shared by the repositories.

use sea_orm::{
    ConnectionTrait, EntityTrait, Order, PaginatorTrait, QueryOrder, QuerySelect, Select,
};

use crate::errors::AppResult;
use crate::types::{Direction, PageRequest};

/// Count `select`, then fetch the requested slice. Pages past the end come
/// back empty without a second query.
///
/// Sort properties are mapped to columns by `column`; unmapped ones are
/// skipped. `tie_breaker` is appended ascending so page boundaries are stable.
pub(super) async fn fetch_page<E, C>(
    conn: &C,
    select: Select<E>,
    request: &PageRequest,
    column: fn(&str) -> Option<E::Column>,
    tie_breaker: E::Column,
) -> AppResult<(Vec<E::Model>, u64)>
where
    E: EntityTrait,
    E::Model: Send + Sync,
    C: ConnectionTrait,
{
    let total = select.clone().count(conn).await?;
    if request.offset() >= total {
        return Ok((Vec::new(), total));
    }

    let mut select = select;
    for order in &request.sort {
        if let Some(col) = column(&order.property) {
            select = select.order_by(col, order_of(order.direction));
        }
    }

    let items = select
        .order_by(tie_breaker, Order::Asc)
        .offset(request.offset())
        .limit(request.size)
        .all(conn)
        .await?;

    Ok((items, total))
}

fn order_of(direction: Direction) -> Order {
    match direction {
        Direction::Asc => Order::Asc,
        Direction::Desc => Order::Desc,
    }
}
