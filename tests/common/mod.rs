#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const MODELS_PY: &str = r#"from django.db import models


class Brand(models.Model):
    name = models.CharField(max_length=100, verbose_name="Название")

    class Meta:
        verbose_name = "Бренд"
        verbose_name_plural = "Бренды"


class Supplier(models.Model):
    name = models.CharField(max_length=100, verbose_name="Название")

    class Meta:
        verbose_name = "Поставщик"
        verbose_name_plural = "Поставщики"


class Unit(models.Model):
    name = models.CharField(max_length=50, verbose_name="Название")


class Category(models.Model):
    name = models.CharField(max_length=100, verbose_name="Название")

    class Meta:
        verbose_name = "Категория"
        verbose_name_plural = "Категории"


class Product(models.Model):
    name = models.CharField(max_length=200, verbose_name="Название")
    brand = models.ForeignKey(Brand, on_delete=models.SET_NULL, null=True, verbose_name="Бренд")
    supplier = models.ForeignKey(Supplier, on_delete=models.SET_NULL, null=True, verbose_name="Поставщик")
    unit = models.ForeignKey(Unit, on_delete=models.SET_NULL, null=True, verbose_name="Единица измерения")
    category = models.ForeignKey(Category, on_delete=models.SET_NULL, null=True, verbose_name="Категория")

    class Meta:
        verbose_name = "Товар"
        verbose_name_plural = "Товары"

    def in_stock(self):
        return Product.objects.filter(pk=self.pk).exists()
"#;

pub const VIEWS_PY: &str = r#"from django.shortcuts import render, get_object_or_404
from .models import Product, Brand
from .forms import ProductForm


def product_list(request):
    products = Product.objects.all().select_related('brand')
    brands = Brand.objects.all().order_by('name')
    return render(request, 'products/list.html', {'products': products, 'brands': brands})


def product_edit(request, pk):
    product = get_object_or_404(Product, pk=pk)
    form = ProductForm(instance=product)
    return render(request, 'products/form.html', {'form': form})
"#;

pub const ADMIN_PY: &str = r#"from django.contrib import admin
from .models import Product, Category, Brand

admin.site.register(Product)
admin.site.register(Category)
admin.site.register(Brand)
"#;

pub const FORMS_PY: &str = r#"from django import forms
from .models import Product


class ProductForm(forms.ModelForm):
    class Meta:
        model = Product
        fields = '__all__'
"#;

pub const BASE_HTML: &str = r#"<html>
<head><title>Магазин обуви | Система управления товарами</title></head>
<body>
<nav><a href="/">Товары</a> <a href="/orders/">Заказы</a></nav>
{% block content %}{% endblock %}
</body>
</html>
"#;

pub const LIST_HTML: &str = r#"{% extends "base.html" %}
{% block content %}
<h1>Список товаров</h1>
<a href="add/">Добавить товар</a>
{% for product in products %}<p>{{ product.name }}</p>{% endfor %}
{% endblock %}
"#;

/// Files that must be copied verbatim, relative to the template root.
pub const PLAIN_FILES: [(&str, &str); 5] = [
    ("README.md", "# Shop\n"),
    ("requirements.txt", "Django>=4.2\n"),
    ("manage.py", "#!/usr/bin/env python\nimport sys\n"),
    ("orders/models.py", "from products.models import Product\n"),
    ("static/css/site.css", "body { margin: 0; }\n"),
];

/// Files the default exclusion policy keeps out, relative to the template root.
pub const EXCLUDED_FILES: [&str; 10] = [
    ".git/config",
    "products/__pycache__/models.cpython-311.pyc",
    "venv/lib/site.py",
    "products/migrations/0001_initial.py",
    "media/products/photo.jpg",
    "db.sqlite3",
    "server.log",
    "notes.txt.bak",
    "generate_variant.py",
    "orders/views.pyc",
];

pub fn write<P: AsRef<Path>>(root: P, relative: &str, content: &str) {
    let path = root.as_ref().join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A workspace holding a template tree at `<tmp>/template`.
pub struct Workspace {
    pub dir: TempDir,
    pub source: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("template");
        write(&source, "products/models.py", MODELS_PY);
        write(&source, "products/views.py", VIEWS_PY);
        write(&source, "products/admin.py", ADMIN_PY);
        write(&source, "products/forms.py", FORMS_PY);
        write(&source, "templates/base.html", BASE_HTML);
        write(&source, "templates/products/list.html", LIST_HTML);
        for (relative, content) in PLAIN_FILES {
            write(&source, relative, content);
        }
        for relative in EXCLUDED_FILES {
            write(&source, relative, "excluded\n");
        }
        Self { dir, source }
    }

    /// A destination inside the workspace, outside the template tree.
    pub fn output(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Number of files the default policy lets through.
    pub fn eligible_files(&self) -> usize {
        6 + PLAIN_FILES.len()
    }
}

/// Every file below `root`, relative and sorted.
pub fn list_files<P: AsRef<Path>>(root: P) -> Vec<PathBuf> {
    let root = root.as_ref();
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
        .collect();
    files.sort();
    files
}

pub fn read<P: AsRef<Path>>(root: P, relative: &str) -> String {
    fs::read_to_string(root.as_ref().join(relative)).unwrap()
}
