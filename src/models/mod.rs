pub mod nutrition;
pub mod theme;
pub mod workout;

pub use nutrition::{day_key, FoodEntry, NutritionLog};
pub use theme::ThemePreference;
pub use workout::{NewWorkout, ProgressData, WorkoutKind, WorkoutRecord};
