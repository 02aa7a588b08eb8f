use std::ops::Add;

/// A counter for the buffer sizes of a
/// [`MultiPolygonArray`][super::MultiPolygonArray].
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiPolygonCapacity {
    pub(crate) coord_capacity: usize,
    pub(crate) ring_capacity: usize,
    pub(crate) polygon_capacity: usize,
    pub(crate) geom_capacity: usize,
}

impl MultiPolygonCapacity {
    pub fn new(
        coord_capacity: usize,
        ring_capacity: usize,
        polygon_capacity: usize,
        geom_capacity: usize,
    ) -> Self {
        Self {
            coord_capacity,
            ring_capacity,
            polygon_capacity,
            geom_capacity,
        }
    }

    pub fn new_empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.coord_capacity == 0
            && self.ring_capacity == 0
            && self.polygon_capacity == 0
            && self.geom_capacity == 0
    }

    #[inline]
    pub fn add_multi_polygon(&mut self, maybe_multi_polygon: Option<&geo::MultiPolygon>) {
        self.geom_capacity += 1;
        if let Some(multi_polygon) = maybe_multi_polygon {
            for polygon in &multi_polygon.0 {
                self.polygon_capacity += 1;
                self.ring_capacity += polygon.interiors().len() + 1;
                self.coord_capacity += polygon.exterior().0.len();
                for interior in polygon.interiors() {
                    self.coord_capacity += interior.0.len();
                }
            }
        }
    }

    pub fn coord_capacity(&self) -> usize {
        self.coord_capacity
    }

    pub fn ring_capacity(&self) -> usize {
        self.ring_capacity
    }

    pub fn polygon_capacity(&self) -> usize {
        self.polygon_capacity
    }

    pub fn geom_capacity(&self) -> usize {
        self.geom_capacity
    }

    pub fn from_multi_polygons<'a>(
        geoms: impl Iterator<Item = Option<&'a geo::MultiPolygon>>,
    ) -> Self {
        let mut counter = Self::new_empty();
        for maybe_multi_polygon in geoms {
            counter.add_multi_polygon(maybe_multi_polygon);
        }
        counter
    }
}

impl Add for MultiPolygonCapacity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(
            self.coord_capacity + rhs.coord_capacity,
            self.ring_capacity + rhs.ring_capacity,
            self.polygon_capacity + rhs.polygon_capacity,
            self.geom_capacity + rhs.geom_capacity,
        )
    }
}
