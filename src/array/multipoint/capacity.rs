use std::ops::Add;

/// A counter for the buffer sizes of a [`MultiPointArray`][super::MultiPointArray].
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiPointCapacity {
    pub(crate) coord_capacity: usize,
    pub(crate) geom_capacity: usize,
}

impl MultiPointCapacity {
    pub fn new(coord_capacity: usize, geom_capacity: usize) -> Self {
        Self {
            coord_capacity,
            geom_capacity,
        }
    }

    pub fn new_empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.coord_capacity == 0 && self.geom_capacity == 0
    }

    #[inline]
    pub fn add_multi_point(&mut self, maybe_multi_point: Option<&geo::MultiPoint>) {
        self.geom_capacity += 1;
        if let Some(multi_point) = maybe_multi_point {
            self.coord_capacity += multi_point.0.len();
        }
    }

    pub fn coord_capacity(&self) -> usize {
        self.coord_capacity
    }

    pub fn geom_capacity(&self) -> usize {
        self.geom_capacity
    }

    pub fn from_multi_points<'a>(
        geoms: impl Iterator<Item = Option<&'a geo::MultiPoint>>,
    ) -> Self {
        let mut counter = Self::new_empty();
        for maybe_multi_point in geoms {
            counter.add_multi_point(maybe_multi_point);
        }
        counter
    }
}

impl Add for MultiPointCapacity {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(
            self.coord_capacity + rhs.coord_capacity,
            self.geom_capacity + rhs.geom_capacity,
        )
    }
}
