/// Array-backed binary min-heap.
///
/// The order is the element's `Ord` implementation; callers that need a tie-break
/// encode it there.
#[derive(Clone, Debug)]
pub struct MinHeap<T> {
    data: Vec<T>,
}

impl<T> Default for MinHeap<T> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

impl<T: Ord> MinHeap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { data: Vec::with_capacity(capacity) }
    }

    pub fn insert(&mut self, element: T) {
        self.data.push(element);
        self.fix_up(self.data.len() - 1);
    }

    /// Removes and returns the minimum, or `None` if the heap is empty.
    pub fn extract(&mut self) -> Option<T> {
        if self.data.is_empty() {
            return None;
        }

        let last = self.data.len() - 1;
        self.data.swap(0, last);
        let min = self.data.pop();
        self.fix_down(0);
        min
    }

    pub fn peek(&self) -> Option<&T> {
        self.data.first()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The backing array in heap order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    fn fix_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.data[parent] <= self.data[i] {
                return;
            }
            self.data.swap(parent, i);
            i = parent;
        }
    }

    fn fix_down(&mut self, mut i: usize) {
        loop {
            let left = 2 * i + 1;
            let right = left + 1;
            if left >= self.data.len() {
                return;
            }

            let mut min_index = left;
            if right < self.data.len() && self.data[right] < self.data[left] {
                min_index = right;
            }
            if self.data[i] <= self.data[min_index] {
                return;
            }

            self.data.swap(i, min_index);
            i = min_index;
        }
    }
}

impl<T: Ord> FromIterator<T> for MinHeap<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut heap = MinHeap::new();
        for element in iter {
            heap.insert(element);
        }
        heap
    }
}
