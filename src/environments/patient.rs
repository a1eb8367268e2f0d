use std::fmt;

#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum Gender {
    Male,
    Female,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum AgeGroup {
    Young,
    Old,
}

/// Gender and age group of a patient. The true effectiveness of every
/// medicine depends only on this category. There are exactly four of them,
/// so per category data is kept in `[T; Category::COUNT]` arrays indexed
/// by `Category::index`.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum Category {
    MaleYoung,
    MaleOld,
    FemaleYoung,
    FemaleOld,
}

impl Category {
    pub const COUNT: usize = 4;
    pub const ALL: [Category; Category::COUNT] = [
        Category::MaleYoung,
        Category::MaleOld,
        Category::FemaleYoung,
        Category::FemaleOld,
    ];

    pub fn new(gender: Gender, age: AgeGroup) -> Self {
        match (gender, age) {
            (Gender::Male, AgeGroup::Young) => Category::MaleYoung,
            (Gender::Male, AgeGroup::Old) => Category::MaleOld,
            (Gender::Female, AgeGroup::Young) => Category::FemaleYoung,
            (Gender::Female, AgeGroup::Old) => Category::FemaleOld,
        }
    }

    pub fn gender(&self) -> Gender {
        match self {
            Category::MaleYoung | Category::MaleOld => Gender::Male,
            Category::FemaleYoung | Category::FemaleOld => Gender::Female,
        }
    }

    pub fn age(&self) -> AgeGroup {
        match self {
            Category::MaleYoung | Category::FemaleYoung => AgeGroup::Young,
            Category::MaleOld | Category::FemaleOld => AgeGroup::Old,
        }
    }

    /// Position of the category in `Category::ALL`.
    pub fn index(&self) -> usize {
        match self {
            Category::MaleYoung => 0,
            Category::MaleOld => 1,
            Category::FemaleYoung => 2,
            Category::FemaleOld => 3,
        }
    }

    /// Key used for the category in configuration files, e.g. `male_young`.
    pub fn key(&self) -> &'static str {
        match self {
            Category::MaleYoung => "male_young",
            Category::MaleOld => "male_old",
            Category::FemaleYoung => "female_young",
            Category::FemaleOld => "female_old",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let gender = match self.gender() {
            Gender::Male => "Male",
            Gender::Female => "Female",
        };
        let age = match self.age() {
            AgeGroup::Young => "Young",
            AgeGroup::Old => "Old",
        };
        write!(f, "{}, {}", gender, age)
    }
}

/// One patient waiting for treatment. `position` is the place in the
/// session's queue; patients are never changed after the queue is generated.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct Patient {
    pub position: usize,
    pub category: Category,
}

impl Patient {
    pub fn new(position: usize, category: Category) -> Self {
        Patient { position, category }
    }
}
