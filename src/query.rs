//! Translates a parsed options record into transport query transforms.

use crate::options::QueryOptions;
use crate::transport::{Query, SortDirection};

/// Apply the options record to a base query.
///
/// Transform order is fixed: raw filter (or the six operator maps in
/// eq/ne/gt/ge/lt/le order, each map in insertion order), then top, skip,
/// select, expand, orderby.
pub fn build_query<'c>(mut query: Query<'c>, options: &QueryOptions) -> Query<'c> {
    if let Some(filter) = &options.filter {
        // Raw $filter wins outright; the operator maps are not merged in.
        query = query.filter_raw(filter);
    } else {
        for (field, value) in &options.eq {
            query = query.eq(field, value);
        }
        for (field, value) in &options.ne {
            query = query.ne(field, value);
        }
        for (field, value) in &options.gt {
            query = query.gt(field, value);
        }
        for (field, value) in &options.ge {
            query = query.ge(field, value);
        }
        for (field, value) in &options.lt {
            query = query.lt(field, value);
        }
        for (field, value) in &options.le {
            query = query.le(field, value);
        }
    }

    if let Some(top) = options.top {
        query = query.top(top);
    }
    if let Some(skip) = options.skip {
        query = query.skip(skip);
    }
    if let Some(select) = &options.select {
        query = query.select(select);
    }
    if let Some(expand) = &options.expand {
        query = query.expand(expand);
    }

    if let Some(orderby) = &options.orderby {
        let mut parts = orderby.split_whitespace();
        if let Some(field) = parts.next() {
            let direction = parts.next().map(SortDirection::parse);
            query = query.order(field, direction);
        }
    }

    query
}
