use geo::{polygon, MultiPolygon};

use crate::test::polygon;

pub(crate) fn mp0() -> MultiPolygon {
    MultiPolygon::new(vec![polygon::p0()])
}

pub(crate) fn mp1() -> MultiPolygon {
    MultiPolygon::new(vec![
        polygon::p1(),
        polygon![
            (x: -60., y: -20.),
            (x: -60., y: -25.),
            (x: -55., y: -25.),
            (x: -55., y: -20.),
        ],
    ])
}
