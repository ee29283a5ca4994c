pub mod limited_spawner;
